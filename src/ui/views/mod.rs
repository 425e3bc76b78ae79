mod job_detail;
mod job_list;

pub use job_detail::JobDetailView;
pub use job_list::JobListView;
