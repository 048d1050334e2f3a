//! Asaas live-gateway adapter.

mod adapter;
mod status;
mod wire;

pub use adapter::AsaasAdapter;
pub use status::{map_asaas_event, map_asaas_status};
