//! Built-in book catalog. Selecting one of these titles fills in the book
//! id, author, fine, price and loan duration; any other title is entered by
//! hand.

use crate::models::CatalogEntry;

const fn entry(
    title: &'static str,
    book_id: &'static str,
    author: &'static str,
    late_return_fine: &'static str,
    selling_price: &'static str,
    days_on_loan: i64,
) -> CatalogEntry {
    CatalogEntry {
        title,
        book_id,
        author,
        late_return_fine,
        selling_price,
        days_on_loan,
    }
}

/// Picker order: the three sample titles, then the African literature shelf.
static CATALOG: [CatalogEntry; 17] = [
    entry("Cinderella", "ISBN-101", "Paul Parker", "2.99", "9.95", 14),
    entry("Game Design", "ISBN-102", "James Ford", "3.50", "12.95", 12),
    entry("Ancient Rome", "ISBN-103", "Julia White", "2.30", "10.99", 10),
    entry(
        "Sundown at Dawn: A Liberian Odyssey",
        "ISBN-104",
        "Wilton G. S. Sankawulo",
        "3.00",
        "15.00",
        14,
    ),
    entry(
        "The Rain and the Night",
        "ISBN-105",
        "Wilton G. S. Sankawulo",
        "3.00",
        "14.00",
        14,
    ),
    entry(
        "Why Nobody Knows When He Will Die and Other Stories",
        "ISBN-106",
        "Wilton G. S. Sankawulo",
        "2.00",
        "14.00",
        14,
    ),
    entry("Things Fall Apart", "ISBN-107", "Chinua Achebe", "3.50", "18.00", 14),
    entry("Arrow of God", "ISBN-108", "Chinua Achebe", "3.50", "17.00", 14),
    entry(
        "Nervous Conditions",
        "ISBN-109",
        "Tsitsi Dangarembga",
        "3.00",
        "16.50",
        14,
    ),
    entry("So Long a Letter", "ISBN-1010", "Mariama Bâ", "2.50", "14.50", 14),
    entry(
        "The Beautyful Ones Are Not Yet Born",
        "ISBN-1011",
        "Ayi Kwei Armah",
        "3.50",
        "18.50",
        14,
    ),
    entry(
        "Season of Migration to the North",
        "ISBN-1012",
        "Tayeb Salih",
        "3.50",
        "19.00",
        14,
    ),
    entry(
        "Petals of Blood",
        "ISBN-1013",
        "Ngũgĩ wa Thiong’o",
        "4.00",
        "20.00",
        14,
    ),
    entry(
        "Weep Not, Child",
        "ISBN-1014",
        "Ngũgĩ wa Thiong’o",
        "3.50",
        "17.50",
        14,
    ),
    entry(
        "The Palm-Wine Drinkard",
        "ISBN-1015",
        "Amos Tutuola",
        "2.50",
        "13.50",
        14,
    ),
    entry(
        "Purple Hibiscus",
        "ISBN-1016",
        "Chimamanda Ngozi Adichie",
        "3.50",
        "19.00",
        14,
    ),
    entry(
        "The Joys of Motherhood",
        "ISBN-1017",
        "Buchi Emecheta",
        "3.00",
        "16.00",
        14,
    ),
];

/// Every catalog entry in picker order.
pub fn entries() -> &'static [CatalogEntry] {
    &CATALOG
}

/// Catalog titles in picker order.
pub fn titles() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|entry| entry.title)
}

/// Exact, case-sensitive lookup by display title.
pub fn lookup(title: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.title == title)
}
