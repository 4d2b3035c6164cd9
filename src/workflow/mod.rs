pub mod invoice_ctx;
pub mod invoice_flow;

pub use invoice_ctx::InvoiceCtx;
pub use invoice_flow::{InvoiceFlow, INVOICE_DOM_ROOT};
