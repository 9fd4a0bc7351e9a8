/// Schema bootstrap for the relational ledger
///
/// Every statement is idempotent, so running the bootstrap against an
/// already provisioned database is a no-op.

pub fn initialization_statements() -> &'static [&'static str] {
    &[
        "PRAGMA foreign_keys = ON;",
        // user_details can be NULL
        "CREATE TABLE IF NOT EXISTS Users (
            email TEXT NOT NULL PRIMARY KEY,
            user_details TEXT,
            CHECK (email LIKE '_%@_%._%' AND email NOT LIKE '%@%@%' AND email NOT LIKE '% %')
        );",
        // 0 operational, 1 delayed, 2 broken
        "CREATE TABLE IF NOT EXISTS Trains (
            train_id INTEGER PRIMARY KEY AUTOINCREMENT,
            capacity INTEGER NOT NULL CHECK (capacity >= 0),
            status INTEGER NOT NULL DEFAULT 0 CHECK (status IN (0, 1, 2))
        );",
        "CREATE TABLE IF NOT EXISTS Tickets (
            ticket_id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_email TEXT NOT NULL REFERENCES Users(email),
            train_id INTEGER NOT NULL REFERENCES Trains(train_id),
            purchase_date TEXT NOT NULL,
            reserved_seat INTEGER NOT NULL DEFAULT 0,
            price REAL NOT NULL,
            start_station_key INTEGER NOT NULL,
            end_station_key INTEGER NOT NULL
        );",
        "CREATE TABLE IF NOT EXISTS PurchaseHistory (
            user_email TEXT NOT NULL REFERENCES Users(email),
            ticket_id INTEGER NOT NULL REFERENCES Tickets(ticket_id),
            purchase_date TEXT NOT NULL,
            PRIMARY KEY (user_email, ticket_id)
        );",
        "CREATE INDEX IF NOT EXISTS idx_tickets_train ON Tickets(train_id);",
        "CREATE INDEX IF NOT EXISTS idx_tickets_user ON Tickets(user_email);",
    ]
}
