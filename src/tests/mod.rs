mod content_tests;
mod email_automation_tests;
mod extract_tests;
mod finance_tests;
mod function_tests;
mod integration_tests;
mod sse_tests;
