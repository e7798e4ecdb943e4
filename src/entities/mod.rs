pub mod company;
pub mod department;
pub mod equipment;
pub mod equipment_category;
pub mod maintenance_request;
pub mod team;
pub mod team_member;
pub mod user;
