/// Adapters layer - Infrastructure implementations
///
/// This layer contains concrete implementations of the ports,
/// providing the actual integration with storage, the network,
/// the filesystem and the console.
pub mod outbound;
