pub mod bit_manipulation;
pub mod const_num;
pub mod even_odd;
pub mod ext;
pub mod moving_avg;
pub mod stats;
