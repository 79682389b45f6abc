pub mod health;
pub mod ingress;
