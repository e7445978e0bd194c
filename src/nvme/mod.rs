// NVMe command encoding and log page layouts
//
// - admin.rs: admin command descriptors and the raw passthrough structure
// - smart.rs: SMART/Health Information log record

pub mod admin;
pub mod smart;

// Re-export commonly used types
pub use admin::{AdminCommand, NSID_ALL, OPCODE_GET_LOG_PAGE};
pub use smart::{SmartInfo, LOG_ID_SMART, SMART_INFO_SIZE};
