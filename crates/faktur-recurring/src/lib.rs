pub mod engine;
pub mod scheduler;
pub mod templates;

pub use engine::{
    Advancement, CycleOutcome, Evaluation, PAYMENT_TERM_DAYS, RecurrenceEngine, calendar_step,
    due_templates,
};
pub use scheduler::{PollLoop, RecurrenceScheduler, TickOutcome, run_polling};
pub use templates::{
    TEMPLATE_NUMBER, TemplateRequest, create_template, delete_template, search_templates,
    toggle_active, update_template, upsert_template,
};
