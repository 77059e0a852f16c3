mod cancellation;
mod variables;
