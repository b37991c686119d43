pub(crate) mod health_check_controller;
pub(crate) mod message_controller;
pub(crate) mod poll_controller;
