mod http_sender_tests;
mod log_sender_tests;
