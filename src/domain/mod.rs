// Domain layer - Plain data types shared by every other layer
pub mod dashboard;
pub mod device;
pub mod message;
