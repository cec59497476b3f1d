// Adapters layer: one module per cloud service, each plugging an SDK client into the
// generic Service and translating short calls into SDK requests.

pub mod kinesis;
pub mod s3;
pub mod sesv2;
