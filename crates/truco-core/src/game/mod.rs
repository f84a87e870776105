pub mod intel;
pub mod match_state;
pub mod response;
