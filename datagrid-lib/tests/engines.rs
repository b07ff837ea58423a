//! Property tests for the filter, sort and pagination engines.

use datagrid_lib::column::{Column, ColumnRegistry, FilterKind};
use datagrid_lib::filter::{self, FilterState};
use datagrid_lib::model::{Record, Value};
use datagrid_lib::pagination::Pagination;
use datagrid_lib::sort::{self, SortDirection, SortState};

fn columns() -> ColumnRegistry {
    ColumnRegistry::new(vec![
        Column::new("name", "Name").sortable(),
        Column::new("team", "Team").sortable().filterable(FilterKind::Text),
        Column::new("joined", "Joined").sortable(),
    ])
    .unwrap()
}

fn records() -> Vec<Record> {
    vec![
        Record::new().set("id", 1i64).set("name", "ada").set("team", "Core"),
        Record::new().set("id", 2i64).set("name", "Bob").set("team", "Core"),
        Record::new().set("id", 3i64).set("name", "cy").set("team", "Web"),
        Record::new().set("id", 4i64).set("name", "Dee"),
        Record::new().set("id", 5i64).set("name", "eve").set("team", "Core"),
        Record::new().set("id", 6i64).set("name", "Fay").set("team", 7i64),
    ]
}

fn ids(records: &[&Record]) -> Vec<i64> {
    records
        .iter()
        .map(|r| match r.get("id") {
            Some(Value::Int(id)) => *id,
            _ => -1,
        })
        .collect()
}

// =============================================================================
// Filter
// =============================================================================

#[test]
fn test_filter_is_idempotent() {
    let records = records();
    let columns = columns();
    let state = FilterState::new().with_free_text("e").with_column("team", "co");

    let once = filter::apply(&records, &state, &columns);
    let twice = filter::apply(once.clone(), &state, &columns);

    assert_eq!(ids(&once), vec![1, 2, 5]);
    assert_eq!(ids(&once), ids(&twice));
}

#[test]
fn test_empty_filter_is_pass_through() {
    let records = records();
    let kept = filter::apply(&records, &FilterState::new().with_free_text("   "), &columns());
    assert_eq!(kept.len(), records.len());
}

#[test]
fn test_filter_indices_match_apply() {
    let records = records();
    let columns = columns();
    let state = FilterState::new().with_quick("team", "Core");

    let indices = filter::filter_indices(&records, &state, &columns);
    assert_eq!(indices, vec![0, 1, 4]);
}

// =============================================================================
// Sort
// =============================================================================

#[test]
fn test_sort_is_stable() {
    let records = records();
    let columns = columns();

    let ascending = sort::apply(records.iter().collect(), &SortState::ascending("team"), &columns);
    assert_eq!(ids(&ascending), vec![1, 2, 5, 3, 6, 4]);

    let descending = sort::apply(records.iter().collect(), &SortState::descending("team"), &columns);
    assert_eq!(ids(&descending), vec![3, 1, 2, 5, 6, 4]);
}

#[test]
fn test_strings_compare_case_insensitively() {
    let records = records();
    let sorted = sort::apply(records.iter().collect(), &SortState::ascending("name"), &columns());
    assert_eq!(ids(&sorted), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_none_direction_is_pass_through() {
    let records = records();
    let state = SortState {
        column_key: Some("name".to_string()),
        direction: SortDirection::None,
    };
    let sorted = sort::apply(records.iter().rev().collect(), &state, &columns());
    assert_eq!(ids(&sorted), vec![6, 5, 4, 3, 2, 1]);
}

#[test]
fn test_dates_and_booleans_order() {
    let columns = ColumnRegistry::new(vec![
        Column::new("when", "When").sortable(),
        Column::new("flag", "Flag").sortable(),
    ])
    .unwrap();
    let day = |d: u32| {
        chrono::NaiveDate::from_ymd_opt(2024, 1, d)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .unwrap()
    };
    let records = vec![
        Record::new().set("id", 1i64).set("when", day(3)).set("flag", true),
        Record::new().set("id", 2i64).set("when", day(1)).set("flag", false),
        Record::new().set("id", 3i64).set("when", day(2)).set("flag", true),
    ];

    let by_date = sort::apply(records.iter().collect(), &SortState::ascending("when"), &columns);
    assert_eq!(ids(&by_date), vec![2, 3, 1]);

    let by_flag = sort::apply(records.iter().collect(), &SortState::ascending("flag"), &columns);
    assert_eq!(ids(&by_flag), vec![2, 1, 3]);
}

#[test]
fn test_three_clicks_return_to_none() {
    let mut state = SortState::none();
    for _ in 0..3 {
        state = state.clicked("name");
    }
    assert_eq!(state, SortState::none());
    assert!(!state.is_active());
}

#[test]
fn test_sort_indices_matches_apply() {
    let records = records();
    let columns = columns();
    let state = SortState::descending("name");

    let mut indices: Vec<usize> = (0..records.len()).collect();
    sort::sort_indices(&records, &mut indices, &state, &columns);
    let via_indices: Vec<&Record> = indices.iter().map(|&i| &records[i]).collect();
    let via_apply = sort::apply(records.iter().collect(), &state, &columns);

    assert_eq!(ids(&via_indices), ids(&via_apply));
}

#[test]
fn test_nan_scores_keep_order_total() {
    let columns = ColumnRegistry::new(vec![Column::new("score", "Score").sortable()]).unwrap();
    let records: Vec<Record> = (0..500i64)
        .map(|i| {
            let score = if i % 7 == 0 {
                f64::NAN
            } else {
                ((i * 7919) % 500) as f64 / 3.0
            };
            Record::new().set("id", i).set("score", score)
        })
        .collect();

    for state in [SortState::ascending("score"), SortState::descending("score")] {
        let sorted = sort::apply(records.iter().collect(), &state, &columns);
        let scores: Vec<f64> = sorted
            .iter()
            .filter_map(|r| r.get("score").and_then(Value::as_f64))
            .filter(|s| !s.is_nan())
            .collect();
        assert_eq!(scores.len(), 500 - 72);
        let ordered = scores.windows(2).all(|w| match state.direction {
            SortDirection::Descending => w[0] >= w[1],
            _ => w[0] <= w[1],
        });
        assert!(ordered, "{:?} order broken", state.direction);

        let mut indices: Vec<usize> = (0..records.len()).collect();
        sort::sort_indices(&records, &mut indices, &state, &columns);
        let via_indices: Vec<&Record> = indices.iter().map(|&i| &records[i]).collect();
        assert_eq!(ids(&via_indices), ids(&sorted));
    }
}

// =============================================================================
// Pagination
// =============================================================================

#[test]
fn test_page_stays_in_range_after_any_change() {
    let mut pagination = Pagination::new(7, 50);
    let steps: [(&str, usize); 12] = [
        ("page", 8),
        ("size", 3),
        ("total", 10),
        ("page", 0),
        ("next", 0),
        ("total", 0),
        ("size", 0),
        ("page", 1000),
        ("total", 999),
        ("last", 0),
        ("size", 100),
        ("previous", 0),
    ];

    for (op, arg) in steps {
        match op {
            "page" => {
                pagination.set_page(arg);
            }
            "size" => {
                pagination.set_page_size(arg);
            }
            "total" => {
                pagination.set_total_count(arg);
            }
            "next" => {
                pagination.next_page();
            }
            "previous" => {
                pagination.previous_page();
            }
            _ => {
                pagination.last_page();
            }
        }
        let page = pagination.page();
        assert!((1..=pagination.total_pages()).contains(&page), "{op}({arg}) left page {page}");
        assert!(pagination.page_size() >= 1);

        let slice = pagination.slice();
        assert!(slice.start_index <= slice.end_index);
        assert!(slice.end_index <= pagination.total_count());
    }
}
