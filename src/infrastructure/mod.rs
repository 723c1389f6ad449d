// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod device_hub;
pub mod json_codec;
pub mod json_file_cache;
pub mod memory_cache;
pub mod ndjson_stream;
