//! Duopage CLI (smoke demo only)
//! The main interface is the library, embedded by reader applications.

use duopage::{Document, LayoutParameters, ReaderSession};

fn main() {
    let text = "It was the best of times, it was the worst of times, it was the age \
                of wisdom, it was the age of foolishness.\n"
        .repeat(40);

    let mut session = ReaderSession::open(
        Document::from_text("demo", text),
        LayoutParameters::default(),
    );

    println!("Duopage pagination core");
    println!("=======================");
    println!();
    println!("Demo document paginated into {} pages.", session.total_pages());
    session.go_to_page(2);
    if let Some(page) = session.page_text(2) {
        println!("Page 2 starts with: {:?}", &page[..page.len().min(40)]);
    }
    println!();
    println!("For the full API, see the library documentation:");
    println!("  cargo doc --open");
}
