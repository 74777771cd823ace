use rusqlite::params;

use super::*;

impl BrokerDb {
    // =========================================================================
    // Planning facts
    // =========================================================================

    /// Clients not yet Closed or Completed, least recently contacted first.
    ///
    /// Never-contacted clients (NULL) sort first.
    pub fn get_followup_clients(&self) -> Result<Vec<FollowUpClient>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, email, status, last_contacted
             FROM clients
             WHERE status NOT IN ('Closed', 'Completed')
             ORDER BY last_contacted ASC, id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(FollowUpClient {
                name: row.get(0)?,
                email: row.get(1)?,
                status: row.get(2)?,
                last_contacted: row.get(3)?,
            })
        })?;

        let mut clients = Vec::new();
        for row in rows {
            clients.push(row?);
        }
        Ok(clients)
    }

    /// Documents not yet received, with the owning client's name.
    pub fn get_missing_documents(&self) -> Result<Vec<MissingDocument>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT c.name, d.type
             FROM documents d
             JOIN clients c ON d.client_id = c.id
             WHERE d.received = 0
             ORDER BY d.id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(MissingDocument {
                name: row.get(0)?,
                doc_type: row.get(1)?,
            })
        })?;

        let mut documents = Vec::new();
        for row in rows {
            documents.push(row?);
        }
        Ok(documents)
    }

    /// Appointments between now and three days from now, soonest first.
    ///
    /// Stored times are naive local wall-clock, so the window is computed in
    /// local time as well.
    pub fn get_upcoming_appointments(&self) -> Result<Vec<Appointment>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT a.id, c.name, a.title, a.datetime
             FROM appointments a
             JOIN clients c ON a.client_id = c.id
             WHERE datetime(a.datetime) BETWEEN datetime('now', 'localtime')
                                           AND datetime('now', 'localtime', '+3 days')
             ORDER BY datetime(a.datetime) ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Appointment {
                id: row.get(0)?,
                name: row.get(1)?,
                title: row.get(2)?,
                datetime: row.get(3)?,
            })
        })?;

        let mut appointments = Vec::new();
        for row in rows {
            appointments.push(row?);
        }
        Ok(appointments)
    }

    // =========================================================================
    // Client lookups and CRM notes
    // =========================================================================

    /// Email address of the first client with exactly this name.
    pub fn get_client_email_by_name(&self, name: &str) -> Result<Option<String>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT email FROM clients
             WHERE name = ?1 AND email IS NOT NULL
             ORDER BY id ASC
             LIMIT 1",
        )?;
        let mut rows = stmt.query_map(params![name], |row| row.get::<_, String>(0))?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Distinct, non-null client email addresses.
    pub fn get_client_emails(&self) -> Result<Vec<String>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT email FROM clients WHERE email IS NOT NULL ORDER BY email")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut emails = Vec::new();
        for row in rows {
            emails.push(row?);
        }
        Ok(emails)
    }

    /// Replace the CRM notes for every client with this email. Returns rows updated.
    pub fn update_client_notes(&self, email: &str, notes: &str) -> Result<usize, DbError> {
        let updated = self.conn.execute(
            "UPDATE clients SET notes = ?1 WHERE email = ?2",
            params![notes, email],
        )?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::{insert_client, test_db};
    use super::*;

    #[test]
    fn test_followups_exclude_closed_and_sort_by_contact() {
        let db = test_db();
        insert_client(&db, "Recent", None, "Pre-Approval", Some("2025-06-05"));
        insert_client(&db, "Stale", None, "Application", Some("2025-05-01"));
        insert_client(&db, "Done", None, "Closed", Some("2025-04-01"));
        insert_client(&db, "Finished", None, "Completed", Some("2025-04-01"));

        let clients = db.get_followup_clients().unwrap();
        let names: Vec<&str> = clients.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Stale", "Recent"]);
        assert_eq!(clients[0].status, "Application");
        assert_eq!(clients[0].last_contacted.as_deref(), Some("2025-05-01"));
    }

    #[test]
    fn test_missing_documents_only_unreceived() {
        let db = test_db();
        let id = insert_client(&db, "Maria Lopez", None, "New", None);
        db.conn_ref()
            .execute(
                "INSERT INTO documents (client_id, type, received) VALUES (?1, 'Payslip', 0), (?1, 'ID proof', 1)",
                params![id],
            )
            .unwrap();

        let docs = db.get_missing_documents().unwrap();
        assert_eq!(
            docs,
            vec![MissingDocument {
                name: "Maria Lopez".to_string(),
                doc_type: "Payslip".to_string(),
            }]
        );
    }

    #[test]
    fn test_upcoming_appointments_window() {
        let db = test_db();
        let id = insert_client(&db, "John Smith", None, "New", None);
        db.conn_ref()
            .execute_batch(&format!(
                "INSERT INTO appointments (client_id, title, datetime) VALUES
                    ({id}, 'Tomorrow', strftime('%Y-%m-%dT%H:%M:%S', 'now', 'localtime', '+1 day')),
                    ({id}, 'Next week', strftime('%Y-%m-%dT%H:%M:%S', 'now', 'localtime', '+7 days')),
                    ({id}, 'Yesterday', strftime('%Y-%m-%dT%H:%M:%S', 'now', 'localtime', '-1 day'));"
            ))
            .unwrap();

        let appts = db.get_upcoming_appointments().unwrap();
        assert_eq!(appts.len(), 1);
        assert_eq!(appts[0].title, "Tomorrow");
        assert_eq!(appts[0].name, "John Smith");
    }

    #[test]
    fn test_upcoming_window_uses_local_wall_clock() {
        let db = test_db();
        let id = insert_client(&db, "Ana Ruiz", None, "New", None);
        let now = chrono::Local::now().naive_local();
        let stamp = |offset: chrono::Duration| (now + offset).format("%Y-%m-%dT%H:%M:%S").to_string();

        for (title, offset) in [
            ("In two hours", chrono::Duration::hours(2)),
            ("Two hours ago", chrono::Duration::hours(-2)),
            ("In 71 hours", chrono::Duration::hours(71)),
            ("In 73 hours", chrono::Duration::hours(73)),
        ] {
            db.conn_ref()
                .execute(
                    "INSERT INTO appointments (client_id, title, datetime) VALUES (?1, ?2, ?3)",
                    rusqlite::params![id, title, stamp(offset)],
                )
                .unwrap();
        }

        let titles: Vec<String> = db
            .get_upcoming_appointments()
            .unwrap()
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, vec!["In two hours", "In 71 hours"]);
    }

    #[test]
    fn test_client_email_by_name() {
        let db = test_db();
        insert_client(&db, "Maria Lopez", Some("maria@example.com"), "New", None);

        assert_eq!(
            db.get_client_email_by_name("Maria Lopez").unwrap().as_deref(),
            Some("maria@example.com")
        );
        assert!(db.get_client_email_by_name("Nobody").unwrap().is_none());
    }

    #[test]
    fn test_client_emails_distinct() {
        let db = test_db();
        insert_client(&db, "A", Some("b@example.com"), "New", None);
        insert_client(&db, "B", Some("a@example.com"), "New", None);
        insert_client(&db, "C", Some("a@example.com"), "New", None);
        insert_client(&db, "D", None, "New", None);

        assert_eq!(
            db.get_client_emails().unwrap(),
            vec!["a@example.com".to_string(), "b@example.com".to_string()]
        );
    }

    #[test]
    fn test_update_client_notes() {
        let db = test_db();
        insert_client(&db, "Client", Some("client@example.com"), "New", None);

        let updated = db
            .update_client_notes("client@example.com", "Needs follow-up")
            .unwrap();
        assert_eq!(updated, 1);

        let notes: String = db
            .conn_ref()
            .query_row(
                "SELECT notes FROM clients WHERE email = 'client@example.com'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(notes, "Needs follow-up");

        assert_eq!(db.update_client_notes("other@example.com", "x").unwrap(), 0);
    }
}
