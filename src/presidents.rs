//! Who presided over the church at a given conference.
//!
//! Annotation only; nothing in the download pipeline branches on it.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};

type Ymd = (i32, u32, u32);

// (name, birth, ordained, end), sorted by ordination.
const TABLE: &[(&str, Ymd, Ymd, Option<Ymd>)] = &[
    ("Joseph Smith", (1805, 12, 23), (1832, 1, 25), Some((1844, 6, 27))),
    ("Brigham Young", (1801, 6, 1), (1847, 12, 27), Some((1877, 8, 29))),
    ("John Taylor", (1808, 11, 1), (1880, 10, 10), Some((1887, 7, 25))),
    ("Wilford Woodruff", (1807, 3, 1), (1889, 4, 7), Some((1898, 9, 2))),
    ("Lorenzo Snow", (1814, 4, 3), (1898, 9, 13), Some((1901, 10, 10))),
    ("Joseph F. Smith", (1838, 11, 13), (1901, 10, 17), Some((1918, 11, 19))),
    ("Heber J. Grant", (1856, 11, 22), (1918, 11, 23), Some((1945, 5, 14))),
    ("George Albert Smith", (1870, 4, 4), (1945, 5, 21), Some((1951, 4, 4))),
    ("David O. McKay", (1873, 9, 8), (1951, 4, 9), Some((1970, 1, 18))),
    ("Joseph Fielding Smith", (1876, 7, 19), (1970, 1, 23), Some((1972, 7, 2))),
    ("Harold B. Lee", (1899, 3, 28), (1972, 7, 7), Some((1973, 12, 26))),
    ("Spencer W. Kimball", (1895, 3, 28), (1973, 12, 30), Some((1985, 11, 5))),
    ("Ezra Taft Benson", (1899, 8, 4), (1985, 11, 10), Some((1994, 5, 30))),
    ("Howard W. Hunter", (1907, 11, 14), (1994, 6, 5), Some((1995, 3, 3))),
    ("Gordon B. Hinckley", (1910, 6, 23), (1995, 3, 12), Some((2008, 1, 27))),
    ("Thomas S. Monson", (1927, 8, 21), (2008, 2, 3), Some((2018, 1, 2))),
    ("Russell M. Nelson", (1924, 9, 9), (2018, 1, 14), None),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presidency {
    pub name: &'static str,
    pub birth: NaiveDate,
    pub ordained: NaiveDate,
    /// `None` while the presidency is ongoing.
    pub end: Option<NaiveDate>,
}

impl Presidency {
    /// Age in whole years on the first of `month`.
    pub fn age_at(&self, year: i32, month: u32) -> i32 {
        let years = year - self.birth.year();
        if month < self.birth.month() || (month == self.birth.month() && self.birth.day() > 1) {
            years - 1
        } else {
            years
        }
    }

    fn ends_on_or_after(&self, ym: (i32, u32)) -> bool {
        self.end.map_or(true, |end| year_month(end) >= ym)
    }
}

static PRESIDENCIES: LazyLock<Vec<Presidency>> = LazyLock::new(|| {
    TABLE
        .iter()
        .map(|&(name, birth, ordained, end)| Presidency {
            name,
            birth: date(birth),
            ordained: date(ordained),
            end: end.map(date),
        })
        .collect()
});

fn date((y, m, d): Ymd) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn year_month(d: NaiveDate) -> (i32, u32) {
    (d.year(), d.month())
}

pub fn presidencies() -> &'static [Presidency] {
    &PRESIDENCIES
}

/// Presidency in office during `year`/`month`, compared at month granularity.
///
/// In a month where one presidency ends and the next begins, the later one wins.
pub fn presiding_at(year: i32, month: u32) -> Option<&'static Presidency> {
    let ym = (year, month);
    let idx = PRESIDENCIES.partition_point(|p| year_month(p.ordained) <= ym);
    let candidate = PRESIDENCIES.get(idx.checked_sub(1)?)?;
    candidate.ends_on_or_after(ym).then_some(candidate)
}

/// April and October of every year in `first_year..=last_year`.
pub fn conference_periods(first_year: i32, last_year: i32) -> impl Iterator<Item = (i32, u32)> {
    (first_year..=last_year).flat_map(|year| [(year, 4), (year, 10)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_at(year: i32, month: u32) -> Option<&'static str> {
        presiding_at(year, month).map(|p| p.name)
    }

    #[test]
    fn table_is_sorted_and_dates_are_sane() {
        let all = presidencies();
        assert_eq!(all.len(), TABLE.len());
        assert!(all.windows(2).all(|w| w[0].ordained < w[1].ordained));
        assert!(all.iter().all(|p| p.birth < p.ordained));
        assert!(all.iter().all(|p| p.end.map_or(true, |e| p.ordained < e)));
    }

    #[test]
    fn known_conferences() {
        assert_eq!(name_at(1971, 4), Some("Joseph Fielding Smith"));
        assert_eq!(name_at(1972, 10), Some("Harold B. Lee"));
        assert_eq!(name_at(1994, 4), Some("Ezra Taft Benson"));
        assert_eq!(name_at(1994, 10), Some("Howard W. Hunter"));
        assert_eq!(name_at(2008, 4), Some("Thomas S. Monson"));
        assert_eq!(name_at(2019, 10), Some("Russell M. Nelson"));
    }

    #[test]
    fn gaps_and_prehistory_have_no_match() {
        assert_eq!(name_at(1800, 4), None);
        // Between Joseph Smith and Brigham Young.
        assert_eq!(name_at(1845, 10), None);
    }

    #[test]
    fn shared_month_goes_to_the_successor() {
        assert_eq!(name_at(1970, 1), Some("Joseph Fielding Smith"));
    }

    #[test]
    fn age_at_conference() {
        let jfs = presiding_at(1971, 4).unwrap();
        assert_eq!(jfs.age_at(1971, 4), 94);
        assert_eq!(jfs.age_at(1971, 7), 94);
        assert_eq!(jfs.age_at(1971, 8), 95);

        // Born on the first: already a year older that month.
        let young = presiding_at(1850, 4).unwrap();
        assert_eq!(young.age_at(1850, 5), 48);
        assert_eq!(young.age_at(1850, 6), 49);
    }

    #[test]
    fn periods_are_april_and_october() {
        let periods: Vec<_> = conference_periods(1971, 1972).collect();
        assert_eq!(periods, vec![(1971, 4), (1971, 10), (1972, 4), (1972, 10)]);
        assert_eq!(conference_periods(1971, 2019).count(), 98);
        assert_eq!(conference_periods(2000, 1999).count(), 0);
    }
}
