pub mod purchase;
pub mod responses;

pub use purchase::{NormalizedAmount, PurchaseRecord};
pub use responses::{
    CreditBalanceResponse, PurchaseResponse, SchemaProbeResponse, SignalsResponse,
};
