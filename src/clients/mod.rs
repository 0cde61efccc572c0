pub mod socialdata;
