/// CSV export of cost samples and scenario traces.
pub mod export;
