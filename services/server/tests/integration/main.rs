mod helpers;
mod http_test;
mod isolation_test;
mod resolver_test;
mod validator_test;
