mod decode;
mod fetch;
mod helpers;
mod ticket_url;
