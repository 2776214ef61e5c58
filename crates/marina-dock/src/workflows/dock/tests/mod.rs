mod common;
mod planner;
mod search;
