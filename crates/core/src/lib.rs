pub mod codes;
pub mod error;
pub mod flight_time;
pub mod id_codec;
pub mod logbook;
pub mod messages;
pub mod provisioning;
pub mod roles;
pub mod scope;
pub mod tx;
pub mod types;
