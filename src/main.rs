use strata::skiplist::SkipList;

fn main() {
    let mut list: SkipList<i32> = [5, 2, 7, 1, 3].into_iter().collect();

    list.insert(4);

    for x in &list {
        print!("{} ", x); // 1 2 3 4 5 7
    }
    println!();

    if list.contains(&3) {
        println!("found 3");
    }

    list.erase(&5);
    println!("{:?}", list); // {1, 2, 3, 4, 7}
}
