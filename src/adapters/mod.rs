pub mod chargepoint;
pub mod db;
