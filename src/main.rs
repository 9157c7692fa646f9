use mobi_reader::{Mobi, MobiOptions};
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <path-to-mobi-file> [--lenient]", args[0]);
        std::process::exit(1);
    }

    let mobi_path = &args[1];
    let options = if args.iter().skip(2).any(|arg| arg == "--lenient") {
        MobiOptions::lenient()
    } else {
        MobiOptions::default()
    };

    println!("Reading MOBI file: {}", mobi_path);
    if options != MobiOptions::default() {
        println!("Tolerating malformed record trailers.");
    }
    println!("{}", "=".repeat(60));

    match Mobi::open_with(mobi_path, options) {
        Ok(book) => {
            let header = book.header();

            println!("\nBook Information:");
            println!("  Title: {}", book.name());
            println!("  Type: {:?}", header.data.mobi_type);
            println!("  Format version: {}", header.data.file_version);
            println!("  Encoding: {}", book.encoding().name());
            println!("  Compression: {:?}", header.palmdoc.compression);

            println!("\nStatistics:");
            println!("  Text records: {}", header.data.first_non_book_record.saturating_sub(1));
            println!("  Declared text length: {} bytes", header.palmdoc.text_length);
            println!("  Decoded text length: {} bytes", book.contents().len());
            println!("  Extra flags: {:#06x}", header.data.extra_flags);
            println!("  Images: {}", book.images().len());

            for image in book.images() {
                println!(
                    "    record {}: {} ({} bytes)",
                    image.record_index,
                    image.format.extension(),
                    image.data.len()
                );
            }

            let text = book.decode_text();
            let preview: String = text.chars().take(200).collect();
            println!("\nText preview:\n{}", preview);
        }
        Err(e) => {
            eprintln!("\nERROR: Failed to read MOBI file");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
