use rowbind::{ColumnType, Field, Filter, Record, RecordType, Result, Row, Table, Value};
use std::sync::OnceLock;
use tempfile::TempDir;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
struct User {
    pk: Option<i64>,
    name: String,
    last_name: String,
    tel: i64,
}

impl User {
    fn new(name: &str, last_name: &str, tel: i64) -> User {
        User {
            pk: None,
            name: name.to_string(),
            last_name: last_name.to_string(),
            tel,
        }
    }
}

impl Record for User {
    fn record_type() -> &'static RecordType {
        static TYPE: OnceLock<RecordType> = OnceLock::new();
        TYPE.get_or_init(|| {
            RecordType::builder("users")
                .field(Field::new("name", ColumnType::Text).datatype("TEXT").lookup())
                .field(Field::new("last_name", ColumnType::Text))
                .field(Field::new("tel", ColumnType::Integer).definition("UNIQUE"))
                .build()
                .expect("valid record type")
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.name.as_str().into(),
            self.last_name.as_str().into(),
            self.tel.into(),
        ]
    }

    fn from_row(mut row: Row) -> Result<User> {
        Ok(User {
            pk: Some(row.pk().into_integer()?),
            name: row.next_column()?.into_text()?,
            last_name: row.next_column()?.into_text()?,
            tel: row.next_column()?.into_integer()?,
        })
    }

    fn pk(&self) -> Value {
        self.pk.into()
    }

    fn set_pk(&mut self, pk: Value) {
        self.pk = pk.as_integer();
    }
}

fn users_table(dir: &TempDir) -> Table<User> {
    Table::open(dir.path().join("users.sqlite")).unwrap()
}

fn three_users(table: &Table<User>) -> Vec<User> {
    let mut users = vec![
        User::new("user1", "L1", 111),
        User::new("user2", "L2", 222),
        User::new("user3", "L3", 333),
    ];
    for user in &mut users {
        table.add(user).unwrap();
    }
    users
}

#[test]
fn add_assigns_rowid_pk() {
    let dir = TempDir::new().unwrap();
    let table = users_table(&dir);

    let mut user = User::new("user1", "L1", 111);
    assert_eq!(user.pk, None);
    table.add(&mut user).unwrap();
    assert_eq!(user.pk, Some(1));
}

#[test]
fn crud_round_trip() {
    let dir = TempDir::new().unwrap();
    let table = users_table(&dir);
    three_users(&table);

    let all = table.get_all().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(
        all.iter().map(|u| u.name.as_str()).collect::<Vec<_>>(),
        vec!["user1", "user2", "user3"]
    );

    // Lookup goes through the lookup field, pk is the assigned rowid
    let user2 = table.get("user2").unwrap().unwrap();
    assert_eq!(user2.pk, Some(2));
    assert_eq!(user2.last_name, "L2");
    assert_eq!(user2.tel, 222);

    let pk1 = all[0].pk.unwrap();
    table.delete(pk1).unwrap();
    let remaining = table.get_all().unwrap();
    assert_eq!(
        remaining.iter().map(|u| u.name.as_str()).collect::<Vec<_>>(),
        vec!["user2", "user3"]
    );
}

#[test]
fn get_by_pk_round_trip() {
    let dir = TempDir::new().unwrap();
    let table = users_table(&dir);
    let users = three_users(&table);

    let found = table.get_by_pk(users[2].pk.unwrap()).unwrap().unwrap();
    assert_eq!(found, users[2]);

    assert!(table.get_by_pk(999).unwrap().is_none());
}

#[test]
fn update_then_read() {
    let dir = TempDir::new().unwrap();
    let table = users_table(&dir);
    let mut users = three_users(&table);

    users[0].last_name = "Updated".to_string();
    table.update(&users[0]).unwrap();

    let reread = table.get_by_pk(users[0].pk.unwrap()).unwrap().unwrap();
    assert_eq!(reread.last_name, "Updated");
    assert_eq!(reread.name, "user1");
}

#[test]
fn update_missing_pk_touches_nothing() {
    let dir = TempDir::new().unwrap();
    let table = users_table(&dir);
    three_users(&table);

    let mut ghost = User::new("ghost", "G", 999);
    ghost.pk = Some(12345);
    table.update(&ghost).unwrap();
    assert_eq!(table.get_all().unwrap().len(), 3);
    assert!(table.get("ghost").unwrap().is_none());
}

#[test]
fn delete_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let table = users_table(&dir);
    three_users(&table);

    table.delete(12345).unwrap();
    assert_eq!(table.get_all().unwrap().len(), 3);
}

#[test]
fn get_or_returns_default_on_miss() {
    let dir = TempDir::new().unwrap();
    let table = users_table(&dir);
    three_users(&table);

    let fallback = User::new("fallback", "F", 777);
    let got = table.get_or("nobody", fallback.clone()).unwrap();
    assert_eq!(got, fallback);

    let got = table.get_or("user3", fallback).unwrap();
    assert_eq!(got.name, "user3");
}

#[test]
fn duplicate_lookup_value_is_an_error() {
    let dir = TempDir::new().unwrap();
    let table = users_table(&dir);

    // The lookup field is unique by contract only; nothing stops duplicates
    table.add(&mut User::new("dup", "A", 1)).unwrap();
    table.add(&mut User::new("dup", "B", 2)).unwrap();

    let err = table.get("dup").unwrap_err();
    assert!(err.is_too_many_records());
}

#[test]
fn get_by_filters() {
    let dir = TempDir::new().unwrap();
    let table = users_table(&dir);
    three_users(&table);

    let hits = table
        .get_by(Filter::new().eq("name", "user1").eq("tel", 111))
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "user1");

    let hits = table
        .get_by(Filter::new().eq("name", "user1").eq("tel", 222))
        .unwrap();
    assert!(hits.is_empty());

    let hits = table
        .get_by(Filter::any().eq("name", "user1").eq("tel", 222))
        .unwrap();
    assert_eq!(hits.len(), 2);

    // Empty filter behaves like get_all
    assert_eq!(table.get_by(Filter::new()).unwrap().len(), 3);
}

// A pseudo-sequential key: `id` takes over the rowid role under its own name.
#[derive(Debug, Clone, PartialEq)]
struct Task {
    pk: Option<i64>,
    id: Option<i64>,
    title: String,
}

impl Record for Task {
    fn record_type() -> &'static RecordType {
        static TYPE: OnceLock<RecordType> = OnceLock::new();
        TYPE.get_or_init(|| {
            RecordType::builder("tasks")
                .field(
                    Field::new("id", ColumnType::Integer)
                        .definition("PRIMARY KEY ASC")
                        .pseudo_key(),
                )
                .field(Field::new("title", ColumnType::Text).lookup())
                .build()
                .expect("valid record type")
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![self.id.into(), self.title.as_str().into()]
    }

    fn from_row(mut row: Row) -> Result<Task> {
        Ok(Task {
            pk: Some(row.pk().into_integer()?),
            id: Some(row.next_column()?.into_integer()?),
            title: row.next_column()?.into_text()?,
        })
    }

    fn pk(&self) -> Value {
        self.pk.into()
    }

    fn set_pk(&mut self, pk: Value) {
        self.pk = pk.as_integer();
    }

    fn set_assigned_key(&mut self, key: Value) {
        self.id = key.as_integer();
    }
}

#[test]
fn pseudo_key_receives_assigned_value() {
    let dir = TempDir::new().unwrap();
    let table: Table<Task> = Table::open(dir.path().join("tasks.sqlite")).unwrap();

    let mut task = Task {
        pk: None,
        id: None,
        title: "write tests".to_string(),
    };
    table.add(&mut task).unwrap();

    // The engine-assigned identifier lands on both pk and the field itself
    assert_eq!(task.pk, Some(1));
    assert_eq!(task.id, Some(1));

    let reread = table.get_by_pk(1).unwrap().unwrap();
    assert_eq!(reread, task);
}

// A caller-assigned UUID primary key on a WITHOUT ROWID table, stored as
// TEXT through registered codec hooks.
#[derive(Debug, Clone, PartialEq)]
struct Device {
    uuid: Uuid,
    name: String,
}

impl Record for Device {
    fn record_type() -> &'static RecordType {
        static TYPE: OnceLock<RecordType> = OnceLock::new();
        TYPE.get_or_init(|| {
            RecordType::builder("devices")
                .field(
                    Field::new("uuid", ColumnType::Any)
                        .datatype("UUID")
                        .definition("PRIMARY KEY"),
                )
                .field(Field::new("name", ColumnType::Text).lookup())
                .without_rowid()
                .build()
                .expect("valid record type")
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![Value::any(self.uuid), self.name.as_str().into()]
    }

    fn from_row(mut row: Row) -> Result<Device> {
        Ok(Device {
            uuid: row.next_column()?.into_any()?,
            name: row.next_column()?.into_text()?,
        })
    }

    fn pk(&self) -> Value {
        Value::any(self.uuid)
    }

    fn set_pk(&mut self, pk: Value) {
        if let Some(uuid) = pk.downcast_ref::<Uuid>() {
            self.uuid = *uuid;
        }
    }
}

fn devices_table(dir: &TempDir) -> Table<Device> {
    Table::builder(dir.path().join("devices.sqlite"))
        .adapter::<Uuid>(|uuid| Value::Text(uuid.to_string()))
        .converter("UUID", |value| {
            let text = value
                .as_text()
                .ok_or_else(|| rowbind::Error::type_conversion(value.name(), "Uuid"))?;
            let uuid = Uuid::parse_str(text)
                .map_err(|_| rowbind::Error::type_conversion("Text", "Uuid"))?;
            Ok(Value::any(uuid))
        })
        .open()
        .unwrap()
}

#[test]
fn uuid_pk_round_trip() {
    let dir = TempDir::new().unwrap();
    let table = devices_table(&dir);

    let uuid = Uuid::new_v4();
    let mut device = Device {
        uuid,
        name: "sensor".to_string(),
    };
    table.add(&mut device).unwrap();

    // The caller-assigned key survives; no engine identifier replaces it
    assert_eq!(device.uuid, uuid);

    let reread = table.get_by_pk(Value::any(uuid)).unwrap().unwrap();
    assert_eq!(reread.uuid, uuid);
    assert_eq!(reread.name, "sensor");

    let by_name = table.get("sensor").unwrap().unwrap();
    assert_eq!(by_name.uuid, uuid);
}

#[test]
fn uuid_pk_update_and_delete() {
    let dir = TempDir::new().unwrap();
    let table = devices_table(&dir);

    let mut device = Device {
        uuid: Uuid::new_v4(),
        name: "gateway".to_string(),
    };
    table.add(&mut device).unwrap();

    device.name = "edge-gateway".to_string();
    table.update(&device).unwrap();
    let reread = table.get_by_pk(Value::any(device.uuid)).unwrap().unwrap();
    assert_eq!(reread.name, "edge-gateway");

    table.delete(Value::any(device.uuid)).unwrap();
    assert!(table.get_all().unwrap().is_empty());
}

// Same table name as User but a different column set: {name, last_name, email}
#[derive(Debug, Clone, PartialEq)]
struct MismatchedUser {
    pk: Option<i64>,
    name: String,
    last_name: String,
    email: String,
}

impl Record for MismatchedUser {
    fn record_type() -> &'static RecordType {
        static TYPE: OnceLock<RecordType> = OnceLock::new();
        TYPE.get_or_init(|| {
            RecordType::builder("users")
                .field(Field::new("name", ColumnType::Text).lookup())
                .field(Field::new("last_name", ColumnType::Text))
                .field(Field::new("email", ColumnType::Text))
                .build()
                .expect("valid record type")
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.name.as_str().into(),
            self.last_name.as_str().into(),
            self.email.as_str().into(),
        ]
    }

    fn from_row(mut row: Row) -> Result<MismatchedUser> {
        Ok(MismatchedUser {
            pk: Some(row.pk().into_integer()?),
            name: row.next_column()?.into_text()?,
            last_name: row.next_column()?.into_text()?,
            email: row.next_column()?.into_text()?,
        })
    }

    fn pk(&self) -> Value {
        self.pk.into()
    }

    fn set_pk(&mut self, pk: Value) {
        self.pk = pk.as_integer();
    }
}

#[test]
fn reopening_with_different_columns_fails_validation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.sqlite");

    let table: Table<User> = Table::open(&path).unwrap();
    table.add(&mut User::new("user1", "L1", 111)).unwrap();
    drop(table);

    let err = Table::<MismatchedUser>::open(&path).unwrap_err();
    assert!(err.is_invalid_schema());
}

// Same columns as Device but rowid-backed: only the WITHOUT ROWID flag
// disagrees with an existing devices table.
#[derive(Debug, Clone, PartialEq)]
struct RowidDevice {
    pk: Option<i64>,
    uuid: String,
    name: String,
}

impl Record for RowidDevice {
    fn record_type() -> &'static RecordType {
        static TYPE: OnceLock<RecordType> = OnceLock::new();
        TYPE.get_or_init(|| {
            RecordType::builder("devices")
                .field(Field::new("uuid", ColumnType::Text))
                .field(Field::new("name", ColumnType::Text).lookup())
                .build()
                .expect("valid record type")
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![self.uuid.as_str().into(), self.name.as_str().into()]
    }

    fn from_row(mut row: Row) -> Result<RowidDevice> {
        Ok(RowidDevice {
            pk: Some(row.pk().into_integer()?),
            uuid: row.next_column()?.into_text()?,
            name: row.next_column()?.into_text()?,
        })
    }

    fn pk(&self) -> Value {
        self.pk.into()
    }

    fn set_pk(&mut self, pk: Value) {
        self.pk = pk.as_integer();
    }
}

#[test]
fn reopening_with_different_rowid_flag_fails_validation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("devices.sqlite");

    // Creates the WITHOUT ROWID table with columns {uuid, name}
    let table = devices_table(&dir);
    drop(table);

    // Identical column set, but a rowid-backed type
    let err = Table::<RowidDevice>::open(&path).unwrap_err();
    assert!(err.is_invalid_schema());
}

#[test]
fn reopening_with_same_type_succeeds() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.sqlite");

    {
        let table: Table<User> = Table::open(&path).unwrap();
        table.add(&mut User::new("user1", "L1", 111)).unwrap();
    }

    let table: Table<User> = Table::open(&path).unwrap();
    let all = table.get_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "user1");
}

#[test]
fn constraint_violation_propagates_as_driver_error() {
    let dir = TempDir::new().unwrap();
    let table = users_table(&dir);

    table.add(&mut User::new("a", "A", 111)).unwrap();
    // tel carries a UNIQUE constraint
    let err = table.add(&mut User::new("b", "B", 111)).unwrap_err();
    assert!(err.is_driver());
}
