//! User record commands - require an active session.

use common::{AppError, AppResult, OptionExt};
use domain::{User, UserForm, UserId};

use super::AppContext;
use crate::cli::{AddArgs, EditArgs, UsersAction};

const TABLE_HEADERS: [&str; 5] = ["ID", "First name", "Last name", "Joined", "Username"];

/// Execute a users action
pub fn execute(ctx: &AppContext, action: UsersAction) -> AppResult<String> {
    if !ctx.auth.is_authenticated()? {
        return Err(AppError::Unauthorized);
    }

    match action {
        UsersAction::List => list(ctx),
        UsersAction::Show { id } => show(ctx, id),
        UsersAction::Add(args) => add(ctx, args),
        UsersAction::Edit(args) => edit(ctx, args),
        UsersAction::Remove { id, yes } => remove(ctx, id, yes),
    }
}

fn list(ctx: &AppContext) -> AppResult<String> {
    let users = ctx.users.list()?;
    if users.is_empty() {
        return Ok("No users registered yet".to_string());
    }
    Ok(render_table(&users))
}

fn show(ctx: &AppContext, id: UserId) -> AppResult<String> {
    let user = ctx.users.find_by_id(id)?.ok_or_not_found()?;
    Ok(render_table(std::slice::from_ref(&user)))
}

fn add(ctx: &AppContext, args: AddArgs) -> AppResult<String> {
    let user = ctx.users.create(UserForm {
        first_name: args.first_name,
        last_name: args.last_name,
        joined_on: args.join_date,
        username: args.username,
        password: args.password,
    })?;
    Ok(format!("Created user {} ({})", user.id, user.username))
}

fn edit(ctx: &AppContext, args: EditArgs) -> AppResult<String> {
    let current = ctx.users.find_by_id(args.id)?.ok_or_not_found()?;

    let mut form = current.to_form();
    if let Some(first_name) = args.first_name {
        form.first_name = first_name;
    }
    if let Some(last_name) = args.last_name {
        form.last_name = last_name;
    }
    if let Some(join_date) = args.join_date {
        form.joined_on = join_date;
    }
    if let Some(username) = args.username {
        form.username = username;
    }
    if let Some(password) = args.password {
        form.password = password;
    }

    // The record can vanish between the lookup and the write
    if !ctx.users.update(args.id, form)? {
        return Err(AppError::NotFound);
    }
    Ok(format!("Updated user {}", args.id))
}

fn remove(ctx: &AppContext, id: UserId, confirmed: bool) -> AppResult<String> {
    if !confirmed {
        return Ok(format!("Not removed: pass --yes to delete user {}", id));
    }
    if !ctx.users.delete(id)? {
        return Err(AppError::NotFound);
    }
    Ok(format!("Removed user {}", id))
}

/// Render users as an aligned text table, passwords omitted
pub fn render_table(users: &[User]) -> String {
    let rows: Vec<[String; 5]> = users
        .iter()
        .map(|user| {
            [
                user.id.to_string(),
                user.first_name.clone(),
                user.last_name.clone(),
                user.joined_on.to_string(),
                user.username.clone(),
            ]
        })
        .collect();

    let mut widths = TABLE_HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: [&str; 5]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| {
                let pad = width - cell.chars().count();
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(TABLE_HEADERS)];
    lines.extend(
        rows.iter()
            .map(|row| format_row(row.each_ref().map(String::as_str))),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use common::{AppConfig, MemoryStore};

    use super::*;

    fn signed_in() -> AppContext {
        let ctx =
            AppContext::with_store(Arc::new(MemoryStore::new()), &AppConfig::default()).unwrap();
        ctx.auth.login("admin", "admin123").unwrap();
        ctx
    }

    fn add_args(username: &str) -> AddArgs {
        AddArgs {
            first_name: "Ana".to_string(),
            last_name: "Ruiz".to_string(),
            join_date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            username: username.to_string(),
            password: "pw".to_string(),
        }
    }

    fn no_changes(id: UserId) -> EditArgs {
        EditArgs {
            id,
            first_name: None,
            last_name: None,
            join_date: None,
            username: None,
            password: None,
        }
    }

    #[test]
    fn test_requires_session() {
        let ctx =
            AppContext::with_store(Arc::new(MemoryStore::new()), &AppConfig::default()).unwrap();
        let result = execute(&ctx, UsersAction::List);
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_add_then_list() {
        let ctx = signed_in();
        let output = execute(&ctx, UsersAction::Add(add_args("ana"))).unwrap();
        assert_eq!(output, "Created user 2 (ana)");

        let table = execute(&ctx, UsersAction::List).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1 "));
        assert!(lines[2].contains("ana"));
        assert!(!table.contains("admin123"));
    }

    #[test]
    fn test_edit_keeps_unspecified_fields() {
        let ctx = signed_in();
        execute(&ctx, UsersAction::Add(add_args("ana"))).unwrap();

        let args = EditArgs {
            last_name: Some("  Soto ".to_string()),
            ..no_changes(2)
        };
        execute(&ctx, UsersAction::Edit(args)).unwrap();

        let user = ctx.users.find_by_id(2).unwrap().unwrap();
        assert_eq!(user.last_name, "Soto");
        assert_eq!(user.first_name, "Ana");
        assert_eq!(user.username, "ana");
    }

    #[test]
    fn test_edit_missing_user() {
        let ctx = signed_in();
        let result = execute(&ctx, UsersAction::Edit(no_changes(99)));
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[test]
    fn test_remove_requires_confirmation() {
        let ctx = signed_in();
        execute(&ctx, UsersAction::Add(add_args("ana"))).unwrap();

        execute(&ctx, UsersAction::Remove { id: 2, yes: false }).unwrap();
        assert!(ctx.users.find_by_id(2).unwrap().is_some());

        execute(&ctx, UsersAction::Remove { id: 2, yes: true }).unwrap();
        assert!(ctx.users.find_by_id(2).unwrap().is_none());

        let again = execute(&ctx, UsersAction::Remove { id: 2, yes: true });
        assert!(matches!(again, Err(AppError::NotFound)));
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let table = render_table(&[User::seed()]);
        assert_eq!(
            table,
            "ID  First name  Last name  Joined      Username\n\
             1   Admin       General    2025-01-01  admin"
        );
    }
}
