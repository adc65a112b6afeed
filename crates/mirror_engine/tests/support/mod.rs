#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDateTime, TimeDelta};
use mirror_engine::LISTING_DATE_FORMAT;

pub fn days_ago(days: i64) -> NaiveDateTime {
    Local::now().naive_local() - TimeDelta::days(days)
}

pub fn listing_date(timestamp: NaiveDateTime) -> String {
    timestamp.format(LISTING_DATE_FORMAT).to_string()
}

/// A listing page shaped like the kitsunekko `dirlist.php` table.
pub fn listing_html(rows: &[(&str, &str, NaiveDateTime)]) -> String {
    let mut body = String::from(
        "<html><body><table id=\"flisttable\">\
         <thead><tr><th>Name</th><th>Size</th><th>Date</th></tr></thead><tbody>",
    );
    for (name, href, modified_at) in rows {
        body.push_str(&format!(
            "<tr><td><a href=\"{href}\"><strong>{name}</strong></a></td>\
             <td class=\"tdleft\">1 KB</td>\
             <td class=\"tdright\" title=\"{}\">recently</td></tr>",
            listing_date(*modified_at)
        ));
    }
    body.push_str("</tbody></table></body></html>");
    body
}

/// Console stand-in that keeps everything written to it.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
