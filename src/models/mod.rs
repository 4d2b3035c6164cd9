pub mod invoice;
pub mod loaders;

pub use invoice::{
    BatchReport, FetchResult, FieldValue, InvoiceRequest, NormalizedInvoiceRequest, SheetRow,
    MSG_NOT_FOUND, MSG_SAVED,
};
pub use loaders::{load_work_list, WorkList};
