//! Response envelope shared by the REST handlers.

use serde::Serialize;

/// `{ "data": T }` envelope wrapping every successful REST payload.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
