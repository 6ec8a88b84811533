pub mod test_max_peers;
pub mod test_shutdown;
