pub mod country;
pub mod department;
pub mod employee;
pub mod job;
pub mod job_chore;
pub mod job_history;
pub mod location;
pub mod piece_of_work;
pub mod region;
