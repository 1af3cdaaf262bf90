mod tests_host;
mod tests_scheduler;
