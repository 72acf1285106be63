pub mod seaorm;

#[cfg(test)]
mod seaorm_tests;
