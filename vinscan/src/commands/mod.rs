pub mod check;
pub mod enroll;
pub mod scan;
