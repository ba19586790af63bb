pub mod absloc;
