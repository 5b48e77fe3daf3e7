pub mod store_const {
    pub const ACCOUNT_TABLE: &str = "accounts";
    pub const USER_TABLE: &str = "users";
    pub const TEACHER_TABLE: &str = "teachers";
    pub const APPOINTMENT_TABLE: &str = "appointments";
    pub const MESSAGE_TABLE: &str = "messages";
    pub const LOG_TABLE: &str = "logs";
}
