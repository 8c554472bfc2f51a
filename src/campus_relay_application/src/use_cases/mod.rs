pub mod sign_in;
pub mod sign_out;
pub mod ticket_url;
