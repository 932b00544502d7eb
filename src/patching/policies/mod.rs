mod severity_policy;
mod vendor_managed_os;
mod vulnerability_routing;

pub use severity_policy::SeverityPolicy;
pub use vendor_managed_os::{VendorManagedOs, DEFAULT_VENDOR_MANAGED_OS};
pub use vulnerability_routing::{VulnerabilityQuery, VulnerabilityRouting};
