pub mod company;
pub mod job;
pub mod user;

pub use company::{Company, CompanyDetail, NewCompany};
pub use job::{Job, JobDetail, JobListing, JobSummary, NewJob};
pub use user::{NewUser, User};
