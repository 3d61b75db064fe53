// Campaign visibility: the decision engine, batch evaluation over a request's
// candidate campaigns, reading-history tracking and display reports.
// Only batch/report/visits touch the store; engine, referer and segmentation are pure.

pub mod batch;
pub mod engine;
pub mod handlers;
pub mod referer;
pub mod report;
pub mod segmentation;
pub mod visits;
