pub mod area_client;
pub mod position_client;
