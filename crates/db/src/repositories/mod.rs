pub mod correlation_repo;
pub mod desk_request_repo;
pub mod link_repo;
pub mod problem_repo;

pub use correlation_repo::CorrelationRepo;
pub use desk_request_repo::DeskRequestRepo;
pub use link_repo::LinkRepo;
pub use problem_repo::ProblemRepo;
