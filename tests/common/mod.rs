/// Common test utilities and mock infrastructure
///
/// - mock_device: in-memory device backend with fault injection
/// - test_helpers: data patterns and SMART page fixtures
pub mod mock_device;
pub mod test_helpers;
