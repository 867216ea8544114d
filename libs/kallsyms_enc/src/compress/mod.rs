pub mod char_counter;
pub mod guess_best_token;
pub mod make_dic;
pub mod tokenize;
