//! Data store modules for Supabase integration

pub mod gateway;
pub mod items;
#[cfg(test)]
pub mod memory;
pub mod supabase;

pub use gateway::{Collection, GatewayError, Predicate, RemoteGateway};
pub use items::{LostFoundItem, ThriftItem};
pub use supabase::SupabaseClient;
