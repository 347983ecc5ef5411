// src/banner.rs

/// Prints the application startup banner to the console.
pub fn print_banner() {
    // Using a raw string literal for the multi-line banner
    let banner = r#"
                _
 _ __ ___  ___| |_ _ __ _   _ _ __ ___
| '__/ _ \/ __| __| '__| | | | '_ ` _ \
| | | (_) \__ \ |_| |  | |_| | | | | | |
|_|  \___/|___/\__|_|   \__,_|_| |_| |_|


    Presentation Coaching Backend
"#;
    println!("{}", banner);
}
